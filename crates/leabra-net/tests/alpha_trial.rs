// Copyright 2026 The Leabra Authors
// SPDX-License-Identifier: Apache-2.0

//! End-to-end alpha trial tests on a small three-layer network

use leabra_net::{Full, LayerType, Network, PrjnType};
use leabra_neural::Time;

fn three_layer_net(seed: u64) -> Network {
    let mut net = Network::with_seed("AlphaTest", seed);
    net.add_layer_2d("In", 1, 4, LayerType::Input);
    net.add_layer_2d("Hid", 1, 4, LayerType::Hidden);
    net.add_layer_2d("Out", 1, 4, LayerType::Target);
    net.connect_layers("In", "Hid", Box::new(Full::new()), PrjnType::Forward)
        .unwrap();
    net.connect_layers("Hid", "Out", Box::new(Full::new()), PrjnType::Forward)
        .unwrap();
    net.connect_layers("Out", "Hid", Box::new(Full::new()), PrjnType::Back)
        .unwrap();
    net.build().unwrap();
    net.init_wts();
    net
}

fn run_trial(net: &mut Network, time: &mut Time, input: &[f32], target: &[f32]) {
    net.init_ext();
    net.apply_ext("In", input).unwrap();
    net.apply_ext("Out", target).unwrap();
    net.trial_init();
    time.trial_start();
    for _ in 0..4 {
        for _ in 0..time.cyc_per_qtr {
            net.cycle();
            time.cycle_inc();
        }
        net.quarter_final(time);
        time.quarter_inc();
    }
}

const INPUT: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
const TARGET: [f32; 4] = [0.0, 1.0, 1.0, 0.0];

#[test]
fn phases_and_clamping() {
    let mut net = three_layer_net(42);
    let mut time = Time::new();
    run_trial(&mut net, &mut time, &INPUT, &TARGET);

    // input layer is hard-clamped to the clamp range
    let in_acts = net.layer("In").unwrap().unit_vals("Act").unwrap();
    assert!((in_acts[0] - 0.95).abs() < 1e-6);
    assert_eq!(in_acts[1], 0.0);

    // target layer is clamped to the target in the plus phase only
    let out = net.layer("Out").unwrap();
    let act_p = out.unit_vals("ActP").unwrap();
    assert!((act_p[1] - 0.95).abs() < 1e-6);
    assert_eq!(act_p[0], 0.0);
    let act_m = out.unit_vals("ActM").unwrap();
    for &am in act_m.iter() {
        assert!((0.0..1.0).contains(&am));
    }

    // hidden activations stay in the rate-code range
    for &a in net.layer("Hid").unwrap().unit_vals("Act").unwrap().iter() {
        assert!((0.0..1.0).contains(&a));
    }

    let (sse, _) = net.layer("Out").unwrap().sse(0.1);
    assert!(sse > 0.0);
}

#[test]
fn delta_send_tracks_full_netinput() {
    let mut net = three_layer_net(7);
    let mut time = Time::new();
    run_trial(&mut net, &mut time, &INPUT, &TARGET);

    // after any cycle, each unit's raw netinput must equal the full
    // recomputed sum of scaled weights times last-sent activations,
    // including the effect of un-sending below-threshold units
    for li in 0..net.layers.len() {
        let nr = net.layers[li].neurons.len();
        let mut exp_ge = vec![0.0f32; nr];
        let mut exp_gi = vec![0.0f32; nr];
        for &pi in net.layers[li].recv_prjns.iter() {
            let pj = &net.prjns[pi];
            let snrns = &net.layers[pj.send_lay].neurons;
            for si in 0..snrns.len() {
                for syi in pj.send_con.range(si) {
                    let ri = pj.send_con.idx[syi] as usize;
                    let g = pj.g_scale * pj.syns[syi].wt * snrns[si].act_sent;
                    if pj.typ == PrjnType::Inhib {
                        exp_gi[ri] += g;
                    } else {
                        exp_ge[ri] += g;
                    }
                }
            }
        }
        for (ni, nrn) in net.layers[li].neurons.iter().enumerate() {
            assert!(
                (nrn.ge_raw - exp_ge[ni]).abs() < 1e-4,
                "layer {} unit {}: ge_raw {} != {}",
                net.layers[li].name,
                ni,
                nrn.ge_raw,
                exp_ge[ni]
            );
            assert!((nrn.gi_raw - exp_gi[ni]).abs() < 1e-4);
        }
    }
}

#[test]
fn learning_updates_weights() {
    let mut net = three_layer_net(21);
    let mut time = Time::new();
    run_trial(&mut net, &mut time, &INPUT, &TARGET);

    let before: Vec<f32> = net.prjns[0].syns.iter().map(|sy| sy.wt).collect();
    net.dwt();
    assert!(net.prjns[0].syns.iter().any(|sy| sy.d_wt != 0.0));
    net.wt_from_dwt();
    let after: Vec<f32> = net.prjns[0].syns.iter().map(|sy| sy.wt).collect();
    assert!(before.iter().zip(after.iter()).any(|(b, a)| b != a));
    // weight changes are consumed by the update
    assert!(net.prjns[0].syns.iter().all(|sy| sy.d_wt == 0.0));
    for sy in net.prjns[0].syns.iter() {
        assert!((0.0..=1.0).contains(&sy.wt));
    }
}

#[test]
fn act_trajectory_is_deterministic_without_learning() {
    // 2-layer, 3-unit all-to-all net, noise off (the default), learning
    // off: the full 100-cycle activation trajectory must repeat exactly
    fn trajectory(seed: u64) -> Vec<f32> {
        let mut net = Network::with_seed("Determ", seed);
        net.add_layer_2d("In", 1, 3, LayerType::Input);
        net.add_layer_2d("Out", 1, 3, LayerType::Hidden);
        net.connect_layers("In", "Out", Box::new(Full::new()), PrjnType::Forward)
            .unwrap();
        net.build().unwrap();
        net.prjns[0].learn.learn = false;
        net.init_wts();
        net.apply_ext("In", &[1.0, 0.0, 0.5]).unwrap();
        net.trial_init();
        let mut traj = Vec::with_capacity(300);
        for _ in 0..100 {
            net.cycle();
            traj.extend(net.layer("Out").unwrap().unit_vals("Act").unwrap());
        }
        traj
    }

    let a = trajectory(31);
    let b = trajectory(31);
    assert_eq!(a.len(), 300);
    for (x, y) in a.iter().zip(b.iter()) {
        assert!((x - y).abs() <= 1e-6);
    }
    // and the trajectory is not degenerate
    assert!(a.iter().any(|&v| v > 0.0));
}

#[test]
fn same_seed_is_deterministic() {
    let mut net_a = three_layer_net(1234);
    let mut net_b = three_layer_net(1234);
    let mut time_a = Time::new();
    let mut time_b = Time::new();
    for _ in 0..3 {
        run_trial(&mut net_a, &mut time_a, &INPUT, &TARGET);
        net_a.dwt();
        net_a.wt_from_dwt();
        run_trial(&mut net_b, &mut time_b, &INPUT, &TARGET);
        net_b.dwt();
        net_b.wt_from_dwt();
    }
    for nm in ["In", "Hid", "Out"] {
        let a = net_a.layer(nm).unwrap().unit_vals("Act").unwrap();
        let b = net_b.layer(nm).unwrap().unit_vals("Act").unwrap();
        assert_eq!(a, b);
    }
    let wa: Vec<f32> = net_a.prjns[1].syns.iter().map(|sy| sy.wt).collect();
    let wb: Vec<f32> = net_b.prjns[1].syns.iter().map(|sy| sy.wt).collect();
    assert_eq!(wa, wb);
}
